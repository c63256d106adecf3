//! Static category and product catalog
//!
//! Menus are numbered from 1 in the order defined here. Each product carries
//! the commodity name Agmarknet uses for it, which is not always the name a
//! farmer would type.

use crate::locale::Language;

/// A sellable product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Display and listing name
    pub name: &'static str,
    /// Commodity name on the Agmarknet report
    pub commodity: &'static str,
}

/// A product category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// English name, also sent to the registry
    pub name: &'static str,
    /// Hindi menu label
    pub label_hi: &'static str,
    pub products: &'static [Product],
}

impl Category {
    pub fn label(&self, lang: Language) -> &'static str {
        match lang {
            Language::En => self.name,
            Language::Hi => self.label_hi,
        }
    }

    /// Resolve a menu reply (1-based index or product name)
    pub fn product(&self, selection: &str) -> Option<&'static Product> {
        let selection = selection.trim();
        if let Some(index) = menu_index(selection, self.products.len()) {
            return self.products.get(index);
        }
        self.products
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(selection))
    }
}

/// Ordered set of categories offered in the listing menu
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    categories: &'static [Category],
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES,
        }
    }
}

impl Catalog {
    pub fn categories(&self) -> &'static [Category] {
        self.categories
    }

    /// Resolve a menu reply (1-based index, English name or Hindi label)
    pub fn category(&self, selection: &str) -> Option<&'static Category> {
        let selection = selection.trim();
        if let Some(index) = menu_index(selection, self.categories.len()) {
            return self.categories.get(index);
        }
        self.categories.iter().find(|c| {
            c.name.eq_ignore_ascii_case(selection) || c.label_hi == selection
        })
    }

    /// Look up a category by its English name
    pub fn by_name(&self, name: &str) -> Option<&'static Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}

fn menu_index(selection: &str, len: usize) -> Option<usize> {
    let n: usize = selection.parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

const fn product(name: &'static str, commodity: &'static str) -> Product {
    Product { name, commodity }
}

const DEFAULT_CATEGORIES: &[Category] = &[
    Category {
        name: "Fruits",
        label_hi: "फल (Fruits)",
        products: &[
            product("Apple", "Apple"),
            product("Banana", "Banana"),
            product("Mango", "Mango"),
            product("Orange", "Orange"),
            product("Grapes", "Grapes"),
        ],
    },
    Category {
        name: "Vegetables",
        label_hi: "सब्ज़ियां (Vegetables)",
        products: &[
            product("Potato", "Potato"),
            product("Onion", "Onion"),
            product("Tomato", "Tomato"),
            product("Carrot", "Carrot"),
            product("Brinjal", "Brinjal"),
        ],
    },
    Category {
        name: "Grains & Pulses",
        label_hi: "अनाज और दालें (Grains & Pulses)",
        products: &[
            product("Rice", "Rice"),
            product("Wheat", "Wheat"),
            product("Moong Dal", "Green Gram Dal (Moong Dal)"),
            product("Arhar Dal", "Arhar Dal(Tur Dal)"),
        ],
    },
    Category {
        name: "Dairy & Eggs",
        label_hi: "डेयरी और अंडे (Dairy & Eggs)",
        products: &[
            product("Milk", "Milk"),
            product("Eggs", "Egg"),
            product("Ghee", "Ghee"),
        ],
    },
    Category {
        name: "Organic",
        label_hi: "जैविक (Organic)",
        products: &[
            product("Organic Apple", "Apple"),
            product("Organic Tomato", "Tomato"),
            product("Organic Rice", "Rice"),
        ],
    },
];
