mod tracer_engine;

pub use tracer_engine::{TracerEngine, TracerOptions};

/// Should be called at the start of each component.
/// Initialises the stdout tracer with the given default level, which `RUST_LOG` may override.
#[macro_export]
macro_rules! init_tracer {
    ($level:expr) => {{
        let tracer = $crate::tracer::TracerEngine::new(
            $crate::tracer::TracerOptions::new($level),
            env!("CARGO_BIN_NAME"),
        );
        tracing::debug!("Tracer initialised for {}", module_path!());
        tracer
    }};
}
