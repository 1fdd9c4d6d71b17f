use shared::domain::Price;

/// Quantity picker shown next to a recipe's price. Never drops below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantitySelector {
    unit_price: Price,
    quantity: u32,
}

impl QuantitySelector {
    pub fn new(unit_price: Price) -> Self {
        Self {
            unit_price,
            quantity: 1,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    pub fn increment(&mut self) -> u32 {
        self.quantity = self.quantity.saturating_add(1);
        self.quantity
    }

    pub fn decrement(&mut self) -> u32 {
        self.quantity = self.quantity.saturating_sub(1).max(1);
        self.quantity
    }

    pub fn total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}
