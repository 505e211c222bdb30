use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = match abc_config::load_defaults() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("abc-lsp: invalid built-in configuration: {error}");
            return ExitCode::FAILURE;
        }
    };
    abc_lsp::serve_stdio(config).await;
    ExitCode::SUCCESS
}
