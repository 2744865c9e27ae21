//! Implements the `Collection` trait against a SheetDB spreadsheet API.

use crate::api::Collection;
use crate::model::RemoteRecord;
use crate::Result;
use anyhow::{bail, Context};
use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

/// How a single record is addressed for `DELETE` and `PUT`. Deployments differ.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressStyle {
    /// `<api_url>?sheet=<sheet>&column=id&value=<id>`
    #[default]
    Query,
    /// `<api_url>/id/<id>?sheet=<sheet>`
    Path,
}

serde_plain::derive_display_from_serialize!(AddressStyle);
serde_plain::derive_fromstr_from_deserialize!(AddressStyle);

/// Talks to the SheetDB REST API at `base`. Each sheet of the spreadsheet is one collection.
pub(super) struct SheetDb {
    client: reqwest::Client,
    base: Url,
    address_style: AddressStyle,
}

impl SheetDb {
    pub(super) fn new(base: Url, address_style: AddressStyle) -> Result<Self> {
        if base.cannot_be_a_base() {
            bail!("The API URL '{base}' cannot be used as a base URL");
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base,
            address_style,
        })
    }

    /// `<api_url>?sheet=<sheet>`
    fn sheet_url(&self, sheet: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("sheet", sheet);
        url
    }

    /// The URL that addresses the record `id` in `sheet`, according to the address style.
    fn record_url(&self, sheet: &str, id: &str) -> Result<Url> {
        let mut url = self.base.clone();
        match self.address_style {
            AddressStyle::Query => {
                url.query_pairs_mut()
                    .append_pair("sheet", sheet)
                    .append_pair("column", "id")
                    .append_pair("value", id);
            }
            AddressStyle::Path => {
                url.path_segments_mut()
                    .map_err(|_| anyhow::anyhow!("The API URL '{}' has no path", self.base))?
                    .pop_if_empty()
                    .push("id")
                    .push(id);
                url.query_pairs_mut().append_pair("sheet", sheet);
            }
        }
        Ok(url)
    }

    /// Sends the request and fails on a transport error or a non-success status, including the
    /// response body in the error.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send the request to {what}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("Request to {what} failed with status {status}: {body}");
        }
        Ok(response)
    }

    async fn write(
        &self,
        method: Method,
        url: Url,
        record: Option<&RemoteRecord>,
        what: &str,
    ) -> Result<()> {
        trace!("{method} {url}");
        let mut request = self.client.request(method, url);
        if let Some(record) = record {
            request = request.json(record);
        }
        let response = self.send(request, what).await?;
        // SheetDB answers writes with a count such as {"created": 1}; it is only logged.
        let body = response.text().await.unwrap_or_default();
        debug!("{what}: {body}");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Collection for SheetDb {
    async fn get(&mut self, sheet: &str) -> Result<Vec<RemoteRecord>> {
        let url = self.sheet_url(sheet);
        trace!("GET {url}");
        let what = format!("fetch sheet '{sheet}'");
        let response = self.send(self.client.get(url), &what).await?;
        response
            .json::<Vec<RemoteRecord>>()
            .await
            .with_context(|| format!("Failed to parse the records of sheet '{sheet}'"))
    }

    async fn append(&mut self, sheet: &str, record: &RemoteRecord) -> Result<()> {
        let url = self.sheet_url(sheet);
        let what = format!("add a record to sheet '{sheet}'");
        self.write(Method::POST, url, Some(record), &what).await
    }

    async fn delete(&mut self, sheet: &str, id: &str) -> Result<()> {
        let url = self.record_url(sheet, id)?;
        let what = format!("delete record '{id}' from sheet '{sheet}'");
        self.write(Method::DELETE, url, None, &what).await
    }

    async fn replace(&mut self, sheet: &str, id: &str, record: &RemoteRecord) -> Result<()> {
        let url = self.record_url(sheet, id)?;
        let what = format!("update record '{id}' in sheet '{sheet}'");
        self.write(Method::PUT, url, Some(record), &what).await
    }
}
