use crate::base::neterror::NetError;
use crate::client::Client;
use crate::http::decoder::{decode_response, Decoded};
use crate::http::response::Response;
use crate::http::transaction::HttpTransaction;
use crate::urlrequest::builder::build_request;
use crate::urlrequest::request::{RequestConfig, REDIRECT_OPTION};

/// Drives one logical request: build, execute, decode, and at most one
/// redirect hop.
pub struct RequestJob {
    client: Client,
    config: RequestConfig,
    redirect_limit: u8,
}

impl RequestJob {
    pub fn new(client: Client, config: RequestConfig) -> Self {
        Self {
            client,
            config,
            redirect_limit: 1,
        }
    }

    pub async fn run(self) -> Result<Response, NetError> {
        let RequestJob {
            client,
            mut config,
            mut redirect_limit,
        } = self;

        loop {
            let follow = redirect_limit > 0 && config.option(REDIRECT_OPTION);
            let url = config.url().to_string();

            match execute_once(&client, config, follow).await? {
                Decoded::Complete(response) => return Ok(response),
                Decoded::Redirect { location } => {
                    redirect_limit -= 1;
                    tracing::debug!(url = %url, location = %location, "following redirect");
                    // The hop re-requests the starting URL with the target as referer.
                    config = RequestConfig::redirect_hop(&url, &location);
                }
            }
        }
    }
}

/// One build, race and decode, with a fresh executor.
async fn execute_once(
    client: &Client,
    mut config: RequestConfig,
    follow_redirect: bool,
) -> Result<Decoded, NetError> {
    let timeout = config
        .timeout()
        .filter(|t| !t.is_zero())
        .unwrap_or(client.default_timeout());
    let cancel = config.cancel_handle();
    let url = config.url().to_string();

    let request = build_request(config, client.base_headers(), client.filesystem()).await?;

    let mut transaction = HttpTransaction::new(client.transport(), Some(timeout), Some(cancel));
    let raw = transaction.start(request).await?;

    decode_response(raw, &url, follow_redirect).await
}
