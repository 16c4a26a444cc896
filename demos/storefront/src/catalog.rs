//! The static product catalog.
//!
//! Read-only. Built on first access and shared for the rest of the process.

use crate::types::{Product, ProductId};
use std::sync::LazyLock;

const ENTRIES: [(u32, &str, u32, &str, &str); 6] = [
    (
        1,
        "Monstera Deliciosa",
        25,
        "Tropical",
        "https://images.unsplash.com/photo-1506744038136-46273834b3fb?auto=format&fit=crop&w=400&q=80",
    ),
    (
        2,
        "Snake Plant",
        18,
        "Succulent",
        "https://images.unsplash.com/photo-1465101046530-73398c7f28ca?auto=format&fit=crop&w=400&q=80",
    ),
    (
        3,
        "Fiddle Leaf Fig",
        30,
        "Tree",
        "https://images.unsplash.com/photo-1519125323398-675f0ddb6308?auto=format&fit=crop&w=400&q=80",
    ),
    (
        4,
        "Aloe Vera",
        15,
        "Succulent",
        "https://images.unsplash.com/photo-1501004318641-b39e6451bec6?auto=format&fit=crop&w=400&q=80",
    ),
    (
        5,
        "Pothos",
        12,
        "Vine",
        "https://images.unsplash.com/photo-1464983953574-0892a716854b?auto=format&fit=crop&w=400&q=80",
    ),
    (
        6,
        "Peace Lily",
        22,
        "Flowering",
        "https://unsplash.com/photos/a-white-flower-with-green-leaves-in-a-vase-xQLLJXHuItc",
    ),
];

/// Every plant for sale, in listing order
pub static PLANTS: LazyLock<Vec<Product>> = LazyLock::new(|| {
    ENTRIES
        .iter()
        .map(|&(id, name, price, category, image)| Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price,
            category: category.to_string(),
            image: image.to_string(),
        })
        .collect()
});

/// Look up a plant by id
#[must_use]
pub fn find(id: ProductId) -> Option<&'static Product> {
    PLANTS.iter().find(|plant| plant.id == id)
}

/// Plants grouped by category
///
/// Categories appear in the order their first plant appears in the catalog,
/// and plants keep catalog order within a category.
#[must_use]
pub fn by_category() -> Vec<(&'static str, Vec<&'static Product>)> {
    let mut groups: Vec<(&'static str, Vec<&'static Product>)> = Vec::new();
    for plant in PLANTS.iter() {
        match groups
            .iter_mut()
            .find(|(category, _)| *category == plant.category)
        {
            Some((_, plants)) => plants.push(plant),
            None => groups.push((plant.category.as_str(), vec![plant])),
        }
    }
    groups
}
