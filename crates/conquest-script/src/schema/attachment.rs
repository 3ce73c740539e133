//! Variables and attachment definitions

use serde::{Deserialize, Serialize};

/// A named list, referenced as `$name$` from option values and foreach
/// expressions. Elements may themselves name other variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    pub elements: Vec<String>,
}

/// One attachment, or one per element when `foreach` is given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentDef {
    /// Attachment key; may contain foreach placeholders.
    pub name: String,
    /// Name of the object to attach to; may contain foreach placeholders.
    pub attach_to: String,
    /// Registry key of the attachment kind, e.g. `UnitAttachment`.
    pub kind: String,
    /// Kind of object `attach_to` names: `unitType`, `territory`, ...
    #[serde(default = "default_target_type")]
    pub target_type: String,
    /// `$a$:$b$` iterates lists in step; `$a$^$b$` takes their cross product.
    #[serde(default)]
    pub foreach: String,
    #[serde(default)]
    pub options: Vec<OptionDef>,
}

fn default_target_type() -> String {
    "unitType".to_string()
}

/// One `name = [count:]value` property assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDef {
    pub name: String,
    #[serde(default)]
    pub value: String,
    /// Prepended to the value as `count:value` when non-empty.
    #[serde(default)]
    pub count: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_def_ron() {
        let ron_str = r#"
        (
            name: "unitAttachment",
            attach_to: "@unit@",
            kind: "UnitAttachment",
            foreach: "$landUnits$",
            options: [
                (name: "Movement", value: "1"),
                (name: "attack", value: "2"),
            ],
        )
        "#;

        let def: AttachmentDef = ron::from_str(ron_str).unwrap();
        assert_eq!(def.target_type, "unitType");
        assert_eq!(def.options.len(), 2);
        assert_eq!(def.options[0].count, "");
    }
}
