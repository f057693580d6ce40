use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let code = guaumiau::run().await?;
    Ok(code)
}
