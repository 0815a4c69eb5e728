//! Built-in products served for the reserved fixture query

use super::types::{Product, ProductId};
use once_cell::sync::Lazy;

static FIXTURE_PRODUCTS: Lazy<Vec<Product>> = Lazy::new(|| {
    vec![
        fixture(
            "1",
            "Classic Black T-Shirt",
            "https://images.unsplash.com/photo-1583743814966-8936f5b7be1a?auto=format&fit=crop&w=800&q=60",
            "Men's Clothing",
            (4.8, 1200),
            (25.00, 40.00),
            &["shirt", "black", "classic", "men"],
        ),
        fixture(
            "2",
            "Minimalist Leather Wallet",
            "https://images.unsplash.com/photo-1620625515032-6ed0a1790485?auto=format&fit=crop&w=800&q=60",
            "Accessories",
            (4.9, 850),
            (45.00, 60.00),
            &["wallet", "leather", "minimalist", "accessory"],
        ),
        fixture(
            "3",
            "Modern White Sneakers",
            "https://images.unsplash.com/photo-1542291026-7eec264c27ff?auto=format&fit=crop&w=800&q=60",
            "Men's Shoes",
            (4.7, 2300),
            (80.00, 120.00),
            &["shoes", "sneakers", "white", "modern"],
        ),
        fixture(
            "4",
            "Sleek Wireless Headphones",
            "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?auto=format&fit=crop&w=800&q=60",
            "Electronics",
            (4.6, 5000),
            (99.99, 149.99),
            &["headphones", "wireless", "audio", "electronics"],
        ),
        fixture(
            "5",
            "Elegant Wrist Watch",
            "https://images.unsplash.com/photo-1524805444758-089113d48a6d?auto=format&fit=crop&w=800&q=60",
            "Watches",
            (4.9, 1500),
            (250.00, 400.00),
            &["watch", "elegant", "timepiece", "accessory"],
        ),
        fixture(
            "6",
            "Monochrome Art Print",
            "https://images.unsplash.com/photo-1524758631624-e2822e304c36?auto=format&fit=crop&w=800&q=60",
            "Home Decor",
            (4.5, 300),
            (35.00, 50.00),
            &["art", "print", "monochrome", "decor"],
        ),
    ]
});

fn fixture(
    id: &str,
    name: &str,
    image: &str,
    category: &str,
    (ratings, no_ratings): (f64, u64),
    (discount_price, actual_price): (f64, f64),
    keywords: &[&str],
) -> Product {
    Product {
        id: Some(ProductId::Text(id.to_string())),
        name: Some(name.to_string()),
        image: Some(image.to_string()),
        category: Some(category.to_string()),
        ratings: Some(ratings),
        no_ratings: Some(no_ratings as f64),
        discount_price: Some(discount_price),
        actual_price: Some(actual_price),
        keywords: Some(keywords.iter().map(|k| k.to_string()).collect()),
    }
}

/// The fixed product list, identical on every call
pub fn fixture_products() -> Vec<Product> {
    FIXTURE_PRODUCTS.clone()
}
