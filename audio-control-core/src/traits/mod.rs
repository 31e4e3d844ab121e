pub mod property_store;
