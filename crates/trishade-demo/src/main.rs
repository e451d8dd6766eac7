use std::process::ExitCode;

use trishade_engine::device::GpuInit;
use trishade_engine::logging::{init_logging, LoggingConfig};
use trishade_engine::shader::BuildPolicy;
use trishade_engine::window::{Runtime, RuntimeConfig, RuntimeError};

mod demo;

use demo::TriangleDemo;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let app = TriangleDemo::new(Default::default(), BuildPolicy::Strict);

    exit_code(Runtime::run(RuntimeConfig::default(), GpuInit::default(), app))
}

/// Maps the run result to the process status, logging a failure.
fn exit_code(result: Result<(), RuntimeError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("trishade exited with an error: {err}");
            ExitCode::FAILURE
        }
    }
}
