//! Options for one firing pass

use conquest_core::codec::Phase;
use conquest_core::TriggerAttachment;

/// How a firing pass filters and accounts for triggers
///
/// The default pass fires every trigger it is given, unfiltered, and leaves
/// their uses alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FireTriggerParams {
    /// Phase of the step being fired around, if any.
    pub before_or_after: Option<Phase>,
    /// Name of the step being fired around, if any.
    pub step_name: Option<String>,
    /// Decrement the uses of every trigger that fired.
    pub use_uses: bool,
    /// Skip triggers with no uses left.
    pub test_uses: bool,
    /// Roll each trigger's chance and skip the ones that miss.
    pub test_chance: bool,
    /// Skip triggers whose `when` does not match the step.
    pub test_when: bool,
}

impl FireTriggerParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pass around `step`, with every test enabled and uses consumed.
    pub fn at_step(phase: Phase, step: impl Into<String>) -> Self {
        Self {
            before_or_after: Some(phase),
            step_name: Some(step.into()),
            use_uses: true,
            test_uses: true,
            test_chance: true,
            test_when: true,
        }
    }

    pub fn with_use_uses(mut self, use_uses: bool) -> Self {
        self.use_uses = use_uses;
        self
    }

    pub fn with_test_uses(mut self, test_uses: bool) -> Self {
        self.test_uses = test_uses;
        self
    }

    pub fn with_test_chance(mut self, test_chance: bool) -> Self {
        self.test_chance = test_chance;
        self
    }

    pub fn with_test_when(mut self, test_when: bool) -> Self {
        self.test_when = test_when;
        self
    }

    /// Same step, with the filters already applied.
    pub(crate) fn untested(&self) -> Self {
        Self {
            before_or_after: self.before_or_after,
            step_name: self.step_name.clone(),
            ..Self::default()
        }
    }

    /// Whether `trigger` is due in this pass.
    ///
    /// A trigger without `when` is due only in passes not tied to a step;
    /// one with `when` is due only around a step it names.
    pub fn when_matches(&self, trigger: &TriggerAttachment) -> bool {
        match (self.before_or_after, self.step_name.as_deref()) {
            (None, None) => trigger.when.is_empty(),
            (Some(phase), Some(step)) => trigger
                .when
                .iter()
                .any(|timing| timing.phase == phase && timing.step == step),
            _ => false,
        }
    }
}
