pub mod config;
pub mod dns_header;
pub mod dns_message;
pub mod dns_question_and_answer;
pub mod error;
pub mod forwarder;
pub mod local;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use server::DnsServer;
pub use shutdown::Shutdown;
