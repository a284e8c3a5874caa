//! Category catalog and client-side derivations over the fetched item list.
//!
//! Everything here is a pure function of its inputs: the displayed item set,
//! the populated-category set, and per-category counts are recomputed from
//! the last fetched collection and never cached across fetches.
//!
//! Category matching is exact string equality. A stored category with a
//! trailing space or different casing does not match any catalog entry and
//! its items only surface through search.

use crate::api::InventoryItem;
use std::collections::BTreeSet;
use url::Url;

/// A browsable category: display name plus its tile image reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    /// Absolute URL, or a path resolved against the API base URL.
    pub image: &'static str,
}

/// The fixed category list, in display order.
pub const CATEGORIES: [Category; 24] = [
    Category { name: "Mobiles & Tablets", image: "https://cdn.grofers.com/cdn-cgi/image/f=auto,fit=scale-down,q=70,metadata=none,w=270/layout-engine/2022-11/Slice-21.png" },
    Category { name: "Computers & Laptops", image: "https://cdn.grofers.com/cdn-cgi/image/f=auto,fit=scale-down,q=70,metadata=none,w=270/layout-engine/2022-11/Slice-22.png" },
    Category { name: "TVs & Electronics", image: "https://cdn.grofers.com/cdn-cgi/image/f=auto,fit=scale-down,q=70,metadata=none,w=270/layout-engine/2022-11/Slice-23.png" },
    Category { name: "Home Appliances", image: "https://cdn.grofers.com/cdn-cgi/image/f=auto,fit=scale-down,q=70,metadata=none,w=270/layout-engine/2022-11/Slice-24.png" },
    Category { name: "Paan Corner", image: "/paan-corner_web.jpg" },
    Category { name: "Dairy, Bread & Eggs", image: "/Slice-2_10.jpg" },
    Category { name: "Fruits & Vegetables", image: "/Slice-3_9.jpg" },
    Category { name: "Cold Drinks & Juices", image: "/Slice-4_9.jpg" },
    Category { name: "Snacks & Munchies", image: "Slice-5_4.jpg" },
    Category { name: "Breakfast & Instant Food", image: "/Slice-6_5.jpg" },
    Category { name: "Sweet Tooth", image: "/Slice-7_3.jpg" },
    Category { name: "Bakery & Biscuits", image: "/Slice-8_4.jpg" },
    Category { name: "Tea, Coffee & Health Drink", image: "/Slice-9_3.jpg" },
    Category { name: "Atta, Rice & Dal", image: "/Slice-10.jpg" },
    Category { name: "Masala, Oil & More", image: "/Slice-11.jpg" },
    Category { name: "Sauces & Spreads", image: "/Slice-12.jpg" },
    Category { name: "Chicken, Meat & Fish", image: "/Slice-13.jpg" },
    Category { name: "Organic & Healthy Living", image: "/Slice-14.jpg" },
    Category { name: "Baby Care", image: "/Slice-15.jpg" },
    Category { name: "Pharma & Wellness", image: "/Slice-16.jpg" },
    Category { name: "Cleaning Essentials", image: "/Slice-17.jpg" },
    Category { name: "Home & Office", image: "/Slice-18.jpg" },
    Category { name: "Personal Care", image: "/Slice-19.jpg" },
    Category { name: "Pet Care", image: "/Slice-20.jpg" },
];

/// Look up a catalog category by exact name.
pub fn find_category(name: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.name == name)
}

/// Set of category labels carried by at least one item.
///
/// Labels are taken verbatim, so the set may contain strings that are not in
/// the catalog; `visible_categories` is what intersects it with `CATEGORIES`.
pub fn populated_categories(items: &[InventoryItem]) -> BTreeSet<String> {
    items.iter().map(|item| item.category.clone()).collect()
}

/// Catalog categories to show in the grid, in catalog order.
pub fn visible_categories(populated: &BTreeSet<String>) -> Vec<&'static Category> {
    CATEGORIES
        .iter()
        .filter(|c| populated.contains(c.name))
        .collect()
}

/// Number of items whose category equals `name` exactly.
pub fn category_count(items: &[InventoryItem], name: &str) -> usize {
    items.iter().filter(|item| item.category == name).count()
}

/// Does `item` satisfy the current category selection and search query?
///
/// Category: exact equality when a category is selected. Query: case-insensitive
/// substring of the name or the category. An empty query matches everything.
pub fn matches(item: &InventoryItem, category: Option<&str>, query: &str) -> bool {
    if let Some(cat) = category {
        if item.category != cat {
            return false;
        }
    }
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    item.name.to_lowercase().contains(&needle) || item.category.to_lowercase().contains(&needle)
}

/// The displayed item list: a pure function of (items, category, query),
/// preserving server order.
pub fn filter_items<'a>(
    items: &'a [InventoryItem],
    category: Option<&str>,
    query: &str,
) -> Vec<&'a InventoryItem> {
    items
        .iter()
        .filter(|item| matches(item, category, query))
        .collect()
}

/// Resolve an image reference for display or opening.
///
/// References starting with `http` are used as-is. Anything else is appended
/// to the API base URL, keeping any path prefix the base carries.
pub fn resolve_image_url(base: &Url, image: &str) -> String {
    let image = image.trim();
    if image.starts_with("http") {
        return image.to_string();
    }
    let base = base.as_str().trim_end_matches('/');
    let path = image.trim_start_matches('/');
    format!("{}/{}", base, path)
}
