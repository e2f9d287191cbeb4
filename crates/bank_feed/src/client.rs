use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use engine::{BankFeed, ConnectedAccount, FeedPage, FeedRequest, ResultEngine};

use crate::{
    FeedError,
    wire::{ErrorBody, RequestOptions, TransactionsRequest, TransactionsResponse, into_page, parse_cursor},
};

/// Aggregator credentials, read from the `[feed]` settings section.
#[derive(Clone, Debug, Deserialize)]
pub struct FeedConfig {
    pub base_url: String,
    pub client_id: String,
    pub secret: String,
}

#[derive(Clone, Debug)]
pub struct FeedClient {
    client: Client,
    config: FeedConfig,
}

impl FeedClient {
    pub fn new(client: Client, config: FeedConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn post_json<TReq: serde::Serialize + ?Sized, TResp: for<'de> serde::Deserialize<'de>>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, FeedError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<TResp>()
                .await
                .map_err(|err| FeedError::Malformed(err.to_string()));
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(err) => err.message(),
            Err(_) => "feed error".to_string(),
        };
        Err(FeedError::Server { status, message })
    }

    async fn transactions_page(
        &self,
        account: &ConnectedAccount,
        request: &FeedRequest,
    ) -> Result<FeedPage, FeedError> {
        let offset = parse_cursor(request.cursor.as_deref())?;
        let body = TransactionsRequest {
            client_id: &self.config.client_id,
            secret: &self.config.secret,
            access_token: &account.access_token,
            start_date: request.start,
            end_date: request.end,
            options: RequestOptions {
                account_ids: [&account.external_account_id],
                count: request.count,
                offset,
            },
        };
        let response: TransactionsResponse = self.post_json("/transactions/get", &body).await?;
        tracing::debug!(
            "feed page for {}: offset {offset}, {} of {} items",
            account.name,
            response.transactions.len(),
            response.total_transactions
        );
        into_page(response, offset)
    }
}

#[async_trait]
impl BankFeed for FeedClient {
    async fn fetch_page(
        &self,
        account: &ConnectedAccount,
        request: &FeedRequest,
    ) -> ResultEngine<FeedPage> {
        Ok(self.transactions_page(account, request).await?)
    }
}
