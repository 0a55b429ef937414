use clap::Parser;

/// Default capacity of each semispace, in bytes.
pub const DEFAULT_HEAP_SIZE: usize = 1024 * 1024;

/// Default capacity of the temporary handle registry.
pub const DEFAULT_MAX_HANDLES: usize = 4096;

/// Raw command line arguments for the stress driver.
#[derive(Parser)]
#[command(about)]
pub struct Args {
    /// Capacity of each semispace in bytes
    #[arg(long, default_value_t = DEFAULT_HEAP_SIZE)]
    pub heap_size: usize,

    /// Maximum number of live temporary handles
    #[arg(long, default_value_t = DEFAULT_MAX_HANDLES)]
    pub max_handles: usize,

    /// Number of allocation rounds to run
    #[arg(long, default_value_t = 1000)]
    pub iterations: usize,

    /// Number of rooted stack slots kept alive between rounds
    #[arg(long, default_value_t = 64)]
    pub live_objects: usize,

    /// Seed for the random object graph generator
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Run a collection before every allocation
    #[arg(long, default_value_t = false)]
    pub stress_test: bool,

    /// Verify the heap and all rooted contents after every round
    #[arg(long, default_value_t = false)]
    pub verify: bool,
}

/// Options for a managed heap.
#[derive(Clone, Debug)]
pub struct GcOptions {
    /// Capacity of each of the two semispaces, in bytes
    pub heap_size: usize,
    /// Maximum number of temporary handles that can be live at once
    pub max_handles: usize,
    /// Collect before every allocation
    pub stress_test: bool,
}

impl GcOptions {
    /// Create a new options struct from the command line arguments.
    pub fn new_from_args(args: &Args) -> Self {
        GcOptionsBuilder::new()
            .heap_size(args.heap_size)
            .max_handles(args.max_handles)
            .stress_test(args.stress_test)
            .build()
    }
}

impl Default for GcOptions {
    /// Create a new options struct with default values.
    fn default() -> Self {
        Self {
            heap_size: DEFAULT_HEAP_SIZE,
            max_handles: DEFAULT_MAX_HANDLES,
            stress_test: false,
        }
    }
}

pub struct GcOptionsBuilder(GcOptions);

impl GcOptionsBuilder {
    pub fn new() -> Self {
        Self(GcOptions::default())
    }

    pub fn heap_size(mut self, heap_size: usize) -> Self {
        self.0.heap_size = heap_size;
        self
    }

    pub fn max_handles(mut self, max_handles: usize) -> Self {
        self.0.max_handles = max_handles;
        self
    }

    pub fn stress_test(mut self, stress_test: bool) -> Self {
        self.0.stress_test = stress_test;
        self
    }

    pub fn build(self) -> GcOptions {
        self.0
    }
}
