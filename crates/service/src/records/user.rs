use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::Record;
use crate::merge_fields;

/// Postal address nested inside a [`User`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    #[serde(default, alias = "city")]
    pub city: String,
    #[serde(default, alias = "state")]
    pub state: String,
    #[serde(default, alias = "country")]
    pub country: String,
    #[serde(default, alias = "pincode", skip_serializing_if = "Option::is_none")]
    pub pincode: Option<Number>,
}

merge_fields!(Address { city, state, country, pincode });

/// User record, stored under its `Name`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(default, alias = "name")]
    pub name: String,
    #[serde(default, alias = "age", skip_serializing_if = "Option::is_none")]
    pub age: Option<Number>,
    #[serde(default, alias = "contact")]
    pub contact: String,
    #[serde(default, alias = "company")]
    pub company: String,
    #[serde(default, alias = "address")]
    pub address: Address,
}

merge_fields!(User { name, age, contact, company, address });

impl Record for User {
    fn resource_name(&self) -> &str {
        &self.name
    }
}
