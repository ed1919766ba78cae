use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    carebook_lib::init_tracing();

    match carebook_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
