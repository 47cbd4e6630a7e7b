pub use sns_draft::api::handler;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    sns_draft::setup_logging();
    lambda_runtime::run(lambda_runtime::service_fn(handler)).await
}
