//! Static currency catalog, swipe cycling and search.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

/// Display order of the selector and the cycling order of swipes.
pub static CURRENCIES: [Currency; 45] = [
    Currency { code: "USD", name: "US Dollar", symbol: "$" },
    Currency { code: "EUR", name: "Euro", symbol: "€" },
    Currency { code: "GBP", name: "British Pound", symbol: "£" },
    Currency { code: "JPY", name: "Japanese Yen", symbol: "¥" },
    Currency { code: "AUD", name: "Australian Dollar", symbol: "A$" },
    Currency { code: "CAD", name: "Canadian Dollar", symbol: "C$" },
    Currency { code: "CHF", name: "Swiss Franc", symbol: "Fr" },
    Currency { code: "CNY", name: "Chinese Yuan", symbol: "¥" },
    Currency { code: "HKD", name: "Hong Kong Dollar", symbol: "HK$" },
    Currency { code: "NZD", name: "New Zealand Dollar", symbol: "NZ$" },
    Currency { code: "SEK", name: "Swedish Krona", symbol: "kr" },
    Currency { code: "KRW", name: "South Korean Won", symbol: "₩" },
    Currency { code: "SGD", name: "Singapore Dollar", symbol: "S$" },
    Currency { code: "NOK", name: "Norwegian Krone", symbol: "kr" },
    Currency { code: "MXN", name: "Mexican Peso", symbol: "$" },
    Currency { code: "INR", name: "Indian Rupee", symbol: "₹" },
    Currency { code: "RUB", name: "Russian Ruble", symbol: "₽" },
    Currency { code: "ZAR", name: "South African Rand", symbol: "R" },
    Currency { code: "TRY", name: "Turkish Lira", symbol: "₺" },
    Currency { code: "BRL", name: "Brazilian Real", symbol: "R$" },
    Currency { code: "TWD", name: "Taiwan Dollar", symbol: "NT$" },
    Currency { code: "DKK", name: "Danish Krone", symbol: "kr" },
    Currency { code: "PLN", name: "Polish Zloty", symbol: "zł" },
    Currency { code: "THB", name: "Thai Baht", symbol: "฿" },
    Currency { code: "IDR", name: "Indonesian Rupiah", symbol: "Rp" },
    Currency { code: "HUF", name: "Hungarian Forint", symbol: "Ft" },
    Currency { code: "CZK", name: "Czech Koruna", symbol: "Kč" },
    Currency { code: "ILS", name: "Israeli Shekel", symbol: "₪" },
    Currency { code: "CLP", name: "Chilean Peso", symbol: "$" },
    Currency { code: "PHP", name: "Philippine Peso", symbol: "₱" },
    Currency { code: "AED", name: "UAE Dirham", symbol: "د.إ" },
    Currency { code: "COP", name: "Colombian Peso", symbol: "$" },
    Currency { code: "SAR", name: "Saudi Riyal", symbol: "﷼" },
    Currency { code: "MYR", name: "Malaysian Ringgit", symbol: "RM" },
    Currency { code: "RON", name: "Romanian Leu", symbol: "lei" },
    Currency { code: "VND", name: "Vietnamese Dong", symbol: "₫" },
    Currency { code: "PKR", name: "Pakistani Rupee", symbol: "₨" },
    Currency { code: "EGP", name: "Egyptian Pound", symbol: "£" },
    Currency { code: "NGN", name: "Nigerian Naira", symbol: "₦" },
    Currency { code: "BDT", name: "Bangladeshi Taka", symbol: "৳" },
    Currency { code: "ARS", name: "Argentine Peso", symbol: "$" },
    Currency { code: "KES", name: "Kenyan Shilling", symbol: "KSh" },
    Currency { code: "QAR", name: "Qatari Riyal", symbol: "﷼" },
    Currency { code: "UAH", name: "Ukrainian Hryvnia", symbol: "₴" },
    Currency { code: "PEN", name: "Peruvian Sol", symbol: "S/" },
];

/// Horizontal swipe distance (logical pixels) that counts as a cycle gesture.
pub const SWIPE_THRESHOLD: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    /// Swiping right goes back through the catalog, swiping left goes forward.
    pub fn from_swipe(dx: f64) -> Option<Self> {
        if dx > SWIPE_THRESHOLD {
            Some(Direction::Prev)
        } else if dx < -SWIPE_THRESHOLD {
            Some(Direction::Next)
        } else {
            None
        }
    }
}

pub fn find_currency(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.code == code)
}

/// Step through `catalog` with wrap-around. An unknown `current` yields the
/// first entry; only an empty catalog yields `None`.
pub fn cycle_currency<'a>(
    current: &str,
    direction: Direction,
    catalog: &'a [Currency],
) -> Option<&'a Currency> {
    let len = catalog.len();
    let Some(index) = catalog.iter().position(|c| c.code == current) else {
        return catalog.first();
    };
    let next = match direction {
        Direction::Next => (index + 1) % len,
        Direction::Prev => (index + len - 1) % len,
    };
    catalog.get(next)
}

/// [`cycle_currency`] over the built-in catalog.
pub fn cycle(current: &str, direction: Direction) -> &'static Currency {
    cycle_currency(current, direction, &CURRENCIES).unwrap_or(&CURRENCIES[0])
}

/// Case-insensitive substring match on code or name, catalog order kept.
/// A blank query returns the whole catalog.
pub fn search_currencies(query: &str) -> Vec<&'static Currency> {
    if query.trim().is_empty() {
        return CURRENCIES.iter().collect();
    }
    let query = query.to_lowercase();
    CURRENCIES
        .iter()
        .filter(|c| c.code.to_lowercase().contains(&query) || c.name.to_lowercase().contains(&query))
        .collect()
}
