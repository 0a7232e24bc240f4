//! Configuration for the compiler and the VM.

/// Number of rewrite rounds the optimizer runs by default.
pub const DEFAULT_PASSES: usize = 10;

/// Default VM stack size, in objects.
pub const DEFAULT_STACK_SIZE: usize = 256;

/// Controls the rewrite pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Upper bound on full pipeline rounds per rule.
    pub passes: usize,

    /// Stop as soon as a round leaves the tree unchanged.
    pub stop_at_fixpoint: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            stop_at_fixpoint: true,
        }
    }
}

impl CompilerConfig {
    /// Builder method to set the round limit.
    #[must_use]
    pub fn with_passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    /// Builder method to enable/disable the fixpoint check.
    #[must_use]
    pub fn with_stop_at_fixpoint(mut self, stop: bool) -> Self {
        self.stop_at_fixpoint = stop;
        self
    }
}

/// Controls VM resource limits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum stack depth before [`StackOverflow`](beanstalk_foundation::VmFault::StackOverflow).
    pub stack_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl VmConfig {
    /// Builder method to set the stack limit.
    #[must_use]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size;
        self
    }
}
