//! # Contact Endpoints
//!
//! Address book CRUD. Every successful change drops cached contact reads.

use serde_json::Value;
use shared::{Contact, ContactRequest, Envelope};

use super::client::ApiClient;
use super::request::RequestDescriptor;

pub const CONTACTS_PATH: &str = "/api/contacts";

impl ApiClient {
    pub async fn get_contacts(&self) -> Envelope<Vec<Contact>> {
        self.fetch(RequestDescriptor::get(CONTACTS_PATH)).await
    }

    pub async fn get_contact(&self, id: &str) -> Envelope<Contact> {
        self.fetch(RequestDescriptor::get(format!("{}/{}", CONTACTS_PATH, id)))
            .await
    }

    #[tracing::instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_contact(&self, request: &ContactRequest) -> Envelope<Contact> {
        self.mutate(RequestDescriptor::post(CONTACTS_PATH).json(request), &[CONTACTS_PATH])
            .await
    }

    pub async fn update_contact(&self, id: &str, request: &ContactRequest) -> Envelope<Contact> {
        self.mutate(
            RequestDescriptor::put(format!("{}/{}", CONTACTS_PATH, id)).json(request),
            &[CONTACTS_PATH],
        )
        .await
    }

    pub async fn delete_contact(&self, id: &str) -> Envelope<Value> {
        self.mutate(
            Ok(RequestDescriptor::delete(format!("{}/{}", CONTACTS_PATH, id))),
            &[CONTACTS_PATH],
        )
        .await
    }
}
