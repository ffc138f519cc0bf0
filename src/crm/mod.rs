//! HubSpot CRM API client
//!
//! One read-only call: fetch the first contact to prove the access token works.

use crate::constants::CONTACTS_PATH;
use crate::error::ApiError;
use crate::{QuickstartError, Result};
use oauth2::AccessToken;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// A contact as shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub vid: Option<u64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Contact {
    /// First and last name joined, skipping whichever is missing
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Deserialize)]
struct ContactList {
    #[serde(default)]
    contacts: Vec<RawContact>,
}

#[derive(Debug, Deserialize)]
struct RawContact {
    #[serde(default)]
    vid: Option<u64>,
    #[serde(default)]
    properties: HashMap<String, Value>,
}

impl RawContact {
    fn property(&self, name: &str) -> Option<String> {
        self.properties
            .get(name)
            .and_then(|p| p.get("value"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

impl From<RawContact> for Contact {
    fn from(raw: RawContact) -> Self {
        Contact {
            vid: raw.vid,
            first_name: raw.property("firstname"),
            last_name: raw.property("lastname"),
        }
    }
}

/// Client for the HubSpot contacts API
#[derive(Clone)]
pub struct ContactsClient {
    contacts_url: Url,
    http_client: reqwest::Client,
}

impl ContactsClient {
    pub fn new(api_base_url: &Url) -> Result<Self> {
        let contacts_url = api_base_url.join(CONTACTS_PATH).map_err(|e| {
            QuickstartError::config(format!("Invalid API base URL {}: {}", api_base_url, e))
        })?;

        Ok(Self {
            contacts_url,
            http_client: reqwest::Client::new(),
        })
    }

    /// Fetch the first contact in the portal
    ///
    /// A missing access token is sent as an empty bearer credential, so the API
    /// rejects it and the rejection is what the caller sees.
    pub async fn first_contact(
        &self,
        access_token: Option<&AccessToken>,
    ) -> std::result::Result<Option<Contact>, ApiError> {
        tracing::info!("Retrieving a contact from HubSpot using the access token");
        let bearer = access_token.map(|t| t.secret().as_str()).unwrap_or_default();

        let response = self
            .http_client
            .get(self.contacts_url.clone())
            .query(&[("count", "1")])
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(ApiError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;

        if !status.is_success() {
            let err = ApiError::rejected(status.as_u16(), &body);
            tracing::error!(status = status.as_u16(), "Unable to retrieve contact: {}", err);
            return Err(err);
        }

        let list: ContactList = serde_json::from_str(&body).map_err(ApiError::invalid_response)?;
        Ok(list.contacts.into_iter().next().map(Contact::from))
    }
}

#[cfg(test)]
mod crm_test;
