pub mod db_connection_info;

pub use db_connection_info::DbConnectionInfo;
