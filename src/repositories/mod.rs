pub mod place_catalog_repo;
