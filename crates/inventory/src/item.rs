//! Individually tracked items.

use serde::{Deserialize, Serialize};

use freshguard_core::{DomainResult, Entity, ItemId, LocationId};

use crate::freshness::{FreshnessThresholds, Status};
use crate::location::validated_name;

/// Fields accepted when adding an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub quantity: u32,
    pub location_id: LocationId,
    pub shelf: Option<String>,
    /// `None` means the expiry date is unknown.
    pub days_to_expire: Option<i32>,
    pub opened: bool,
    /// Status to report while the expiry date is unknown.
    pub status: Option<Status>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, location_id: LocationId) -> Self {
        Self {
            name: name.into(),
            quantity: 1,
            location_id,
            shelf: None,
            days_to_expire: None,
            opened: false,
            status: None,
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn expires_in(mut self, days: i32) -> Self {
        self.days_to_expire = Some(days);
        self
    }

    pub fn on_shelf(mut self, shelf: impl Into<String>) -> Self {
        self.shelf = Some(shelf.into());
        self
    }

    pub fn opened(mut self) -> Self {
        self.opened = true;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: u32,
    location_id: LocationId,
    shelf: Option<String>,
    days_to_expire: Option<i32>,
    opened: bool,
    explicit_status: Option<Status>,
}

impl Item {
    /// Validate and build. Quantity is clamped to at least 1.
    pub fn create(id: ItemId, fields: &NewItem) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validated_name(&fields.name)?,
            quantity: fields.quantity.max(1),
            location_id: fields.location_id,
            shelf: clean_shelf(fields.shelf.as_deref()),
            days_to_expire: fields.days_to_expire,
            opened: fields.opened,
            explicit_status: fields.status,
        })
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    pub fn shelf(&self) -> Option<&str> {
        self.shelf.as_deref()
    }

    pub fn days_to_expire(&self) -> Option<i32> {
        self.days_to_expire
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn status_with(&self, thresholds: &FreshnessThresholds) -> Status {
        thresholds.resolve(self.days_to_expire, self.explicit_status)
    }

    pub fn status(&self) -> Status {
        self.status_with(&FreshnessThresholds::DEFAULT)
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_opened(&mut self, opened: bool) {
        self.opened = opened;
    }

    pub(crate) fn set_location(&mut self, location_id: LocationId) {
        self.location_id = location_id;
    }
}

impl Entity for Item {
    type Id = ItemId;
    const KIND: &'static str = "item";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

pub(crate) fn clean_shelf(shelf: Option<&str>) -> Option<String> {
    shelf
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use freshguard_core::DomainError;

    #[test]
    fn zero_quantity_is_clamped_to_one() {
        let item = Item::create(ItemId::new(), &NewItem::new("Milk", LocationId::new()).quantity(0)).unwrap();
        assert_eq!(item.quantity(), 1);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Item::create(ItemId::new(), &NewItem::new("", LocationId::new())).unwrap_err();
        assert!(matches!(err, DomainError::InvalidField(_)));
    }

    #[test]
    fn status_is_derived_from_days_when_known() {
        let item = Item::create(
            ItemId::new(),
            &NewItem::new("Strawberries", LocationId::new())
                .expires_in(0)
                .with_status(Status::Fresh),
        )
        .unwrap();
        assert_eq!(item.status(), Status::DueToday);
    }

    #[test]
    fn unknown_expiry_keeps_explicit_status() {
        let loc = LocationId::new();
        let plain = Item::create(ItemId::new(), &NewItem::new("Rice", loc)).unwrap();
        let flagged = Item::create(ItemId::new(), &NewItem::new("Leftovers", loc).with_status(Status::Urgent)).unwrap();
        assert_eq!(plain.status(), Status::Fresh);
        assert_eq!(flagged.status(), Status::Urgent);
    }

    #[test]
    fn blank_shelf_is_dropped() {
        let item = Item::create(ItemId::new(), &NewItem::new("Eggs", LocationId::new()).on_shelf("  ")).unwrap();
        assert_eq!(item.shelf(), None);
    }
}
