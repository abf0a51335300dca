//! Collaborator records the engine reads by key but does not own.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stockflow_core::{AddressId, CategoryId, CustomerId, SupplierId};

use super::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
}

/// Shipping address; owned by exactly one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub customer_id: CustomerId,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Read-only lookups the order assembler needs from customer records.
pub trait Directory: Send + Sync {
    /// `true` only when the customer exists and the address belongs to them.
    fn address_belongs_to_customer(
        &self,
        address_id: AddressId,
        customer_id: CustomerId,
    ) -> Result<bool, StoreError>;
}

impl<T> Directory for Arc<T>
where
    T: Directory + ?Sized,
{
    fn address_belongs_to_customer(
        &self,
        address_id: AddressId,
        customer_id: CustomerId,
    ) -> Result<bool, StoreError> {
        (**self).address_belongs_to_customer(address_id, customer_id)
    }
}
