pub mod device_enumerator;
