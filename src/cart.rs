//! Shopping list

use crate::error::FastingError;
use serde::{Deserialize, Serialize};

/// One line of the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShoppingCart {
    items: Vec<CartItem>,
}

impl ShoppingCart {
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item; adding an id already in the cart bumps its quantity instead
    pub fn add(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => self.items.push(CartItem { quantity: 1, ..item }),
        }
    }

    /// Remove an item. Returns false when it was not in the cart.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Set an item's quantity; zero removes it
    pub fn update_quantity(&mut self, id: &str, quantity: u32) -> Result<(), FastingError> {
        if quantity == 0 {
            if self.remove(id) {
                return Ok(());
            }
        } else if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = quantity;
            return Ok(());
        }
        Err(FastingError::Validation(format!("no cart item with id '{id}'")))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("item {id}"),
            amount: Some("200".to_string()),
            unit: Some("g".to_string()),
            category: Some("produce".to_string()),
            quantity: 5,
        }
    }

    #[test]
    fn test_add_merges_quantity() {
        let mut cart = ShoppingCart::default();
        cart.add(item("oats"));
        cart.add(item("oats"));
        cart.add(item("eggs"));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[1].quantity, 1);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = ShoppingCart::default();
        cart.add(item("oats"));
        cart.update_quantity("oats", 4).unwrap();
        assert_eq!(cart.items()[0].quantity, 4);

        cart.update_quantity("oats", 0).unwrap();
        assert!(cart.is_empty());

        assert!(matches!(
            cart.update_quantity("missing", 2),
            Err(FastingError::Validation(_))
        ));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = ShoppingCart::default();
        cart.add(item("a"));
        cart.add(item("b"));
        assert!(cart.remove("a"));
        assert!(!cart.remove("a"));

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_item_quantity_defaults_to_one() {
        let parsed: CartItem = serde_json::from_str(r#"{"id":"x","name":"Lentils"}"#).unwrap();
        assert_eq!(parsed.quantity, 1);
        assert!(parsed.unit.is_none());
    }
}
