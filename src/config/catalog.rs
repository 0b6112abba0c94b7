use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value as JsonValue };
use std::fs;
use std::path::{ Path, PathBuf };
use thiserror::Error;
use log::{ info, debug };

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A storefront product. Only `name` is interpreted; every other field of the
/// catalog entry is carried along untouched.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: Map::new() }
    }
}

/// Read-only product list, loaded once at startup and shared by reference.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded {} products from '{}'", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let products: Vec<Product> = serde_json::from_str(content)?;
        Ok(Self { products })
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products whose lower-cased name contains `term`, in catalog order.
    /// `term` is expected to be lower-case already.
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let found: Vec<&Product> = self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(term))
            .collect();
        debug!("Catalog search for '{}' matched {} product(s)", term, found.len());
        found
    }
}
