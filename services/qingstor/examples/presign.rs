//! Example of creating a presigned url for downloading an object.
//!
//! ```shell
//! QINGSTOR_ACCESS_KEY_ID=xxx QINGSTOR_SECRET_ACCESS_KEY=xxx \
//!     cargo run --example presign -- my-bucket pek3b path/to/object
//! ```

use std::time::Duration;

use qingstor_core::{Context, OsEnv};
use qingstor_file_read_tokio::TokioFileRead;
use qingstor_http_send_reqwest::ReqwestHttpSend;
use qingstor_sdk::{Config, GetObjectInput, QingStor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(bucket), Some(zone), Some(key)) = (args.next(), args.next(), args.next()) else {
        anyhow::bail!("usage: presign <bucket> <zone> <key>");
    };

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::new().from_env(&ctx).from_default_file(&ctx).await?;
    let client = QingStor::new(ctx, config)?;

    let bucket = client.bucket(bucket, zone);
    let url = bucket
        .presign(
            bucket.get_object_operation(&key, GetObjectInput::default()),
            Duration::from_secs(3600),
        )
        .await?;

    println!("{url}");
    Ok(())
}
