//! Menu browsing helpers: category filter and the product picker state

use rust_decimal::Decimal;
use shared::models::{Customizations, Drink, Size, Sugar};

use crate::cart::CartStore;

/// Menu tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    All,
    Coffee,
    Espresso,
    Cappuccino,
    Tea,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::All,
        Category::Coffee,
        Category::Espresso,
        Category::Cappuccino,
        Category::Tea,
    ];

    /// Value of `coffeeType` this tab matches (`None` for all)
    pub fn coffee_type(&self) -> Option<&'static str> {
        match self {
            Category::All => None,
            Category::Coffee => Some("coffee"),
            Category::Espresso => Some("espresso"),
            Category::Cappuccino => Some("cappuccino"),
            Category::Tea => Some("tea"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All Menu",
            Category::Coffee => "Coffee",
            Category::Espresso => "Espresso",
            Category::Cappuccino => "Cappuccino",
            Category::Tea => "Tea",
        }
    }
}

pub fn filter_menu(drinks: &[Drink], category: Category) -> Vec<&Drink> {
    match category.coffee_type() {
        None => drinks.iter().collect(),
        Some(kind) => drinks
            .iter()
            .filter(|d| d.coffee_type.as_deref() == Some(kind))
            .collect(),
    }
}

/// Price shown on the menu card: first listed size, else zero
pub fn base_price(drink: &Drink) -> Decimal {
    drink.sizes.first().map(|s| s.price).unwrap_or_default()
}

/// State of the "add to cart" picker for one drink
///
/// Starts on the first listed size with no sugar and no spice.
#[derive(Debug, Clone)]
pub struct ProductSelection<'a> {
    drink: &'a Drink,
    size: Option<Size>,
    customizations: Customizations,
}

impl<'a> ProductSelection<'a> {
    pub fn new(drink: &'a Drink) -> Self {
        Self {
            drink,
            size: drink.default_size(),
            customizations: Customizations::new(Sugar::NoSugar, false),
        }
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn customizations(&self) -> Customizations {
        self.customizations
    }

    /// Select a size the drink offers; returns false otherwise
    pub fn set_size(&mut self, size: Size) -> bool {
        if self.drink.price_for(size).is_some() {
            self.size = Some(size);
            true
        } else {
            false
        }
    }

    pub fn set_sugar(&mut self, sugar: Sugar) {
        self.customizations.sugar = sugar;
    }

    pub fn set_spiced(&mut self, spiced: bool) {
        self.customizations.spiced = spiced;
    }

    /// Unit price of the current size, zero when none is selected
    pub fn price(&self) -> Decimal {
        self.size
            .and_then(|size| self.drink.price_for(size))
            .unwrap_or_default()
    }

    /// Add the selection to the cart; `None` when the drink has no sizes
    pub fn add_to_cart(&self, cart: &mut CartStore) -> Option<String> {
        let size = self.size?;
        Some(cart.add_item(self.drink, size, self.customizations, self.price()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use shared::models::{DrinkOptions, SizePrice};

    fn drink(id: &str, kind: &str, prices: &[(Size, i64)]) -> Drink {
        Drink {
            id: id.into(),
            title: id.to_uppercase(),
            description: None,
            coffee_type: Some(kind.into()),
            image: None,
            sizes: prices
                .iter()
                .map(|(size, price)| SizePrice {
                    size: *size,
                    price: Decimal::from(*price),
                })
                .collect(),
            options: DrinkOptions::default(),
            is_available: true,
        }
    }

    #[test]
    fn test_filter_by_category() {
        let menu = vec![
            drink("latte", "coffee", &[(Size::Small, 30)]),
            drink("karak", "tea", &[(Size::Small, 20)]),
        ];
        assert_eq!(filter_menu(&menu, Category::All).len(), 2);
        let tea = filter_menu(&menu, Category::Tea);
        assert_eq!(tea.len(), 1);
        assert_eq!(tea[0].id, "karak");
        assert!(filter_menu(&menu, Category::Espresso).is_empty());
    }

    #[test]
    fn test_selection_defaults_and_price() {
        let latte = drink("latte", "coffee", &[(Size::Small, 30), (Size::Large, 50)]);
        let mut selection = ProductSelection::new(&latte);

        assert_eq!(selection.size(), Some(Size::Small));
        assert_eq!(selection.customizations(), Customizations::default());
        assert_eq!(selection.price(), Decimal::from(30));
        assert_eq!(base_price(&latte), Decimal::from(30));

        assert!(!selection.set_size(Size::Medium));
        assert!(selection.set_size(Size::Large));
        assert_eq!(selection.price(), Decimal::from(50));
    }

    #[test]
    fn test_add_selection_to_cart() {
        let latte = drink("latte", "coffee", &[(Size::Medium, 45)]);
        let mut cart = CartStore::load(MemoryStore::shared());

        let mut selection = ProductSelection::new(&latte);
        selection.set_sugar(Sugar::TwoShots);
        selection.set_spiced(true);
        selection.add_to_cart(&mut cart).unwrap();
        selection.add_to_cart(&mut cart).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total(), Decimal::from(90));

        let empty = drink("ghost", "coffee", &[]);
        assert!(ProductSelection::new(&empty).add_to_cart(&mut cart).is_none());
        assert_eq!(base_price(&empty), Decimal::ZERO);
    }
}
