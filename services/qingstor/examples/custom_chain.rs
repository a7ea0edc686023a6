//! Example of loading credentials from a custom provider chain.

use qingstor_core::{Context, OsEnv, ProvideCredential, ProvideCredentialChain};
use qingstor_file_read_tokio::TokioFileRead;
use qingstor_http_send_reqwest::ReqwestHttpSend;
use qingstor_sdk::{
    Config, ConfigFileCredentialProvider, Credential, EnvCredentialProvider, QingStor,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    // Prefer a project local config file, then fall back to env.
    let chain: ProvideCredentialChain<Credential> = ProvideCredentialChain::new()
        .push(ConfigFileCredentialProvider::new().with_path("./qingstor.yaml"))
        .push(EnvCredentialProvider::new());

    match chain.provide_credential(&ctx).await? {
        Some(cred) => println!("found credential: {cred:?}"),
        None => {
            println!("no credential found");
            return Ok(());
        }
    }

    let client = QingStor::with_credential_provider(ctx, Config::new(), chain);
    let out = client.list_buckets(None).await?;
    println!("{}", String::from_utf8_lossy(&out.body));
    Ok(())
}
