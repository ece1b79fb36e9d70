//! stackmon-aws — AWS-backed implementations of the stackmon ports.
//!
//! - [`S3StateSource`] reads Terraform state objects from S3.
//! - [`SecretsManagerCredentials`] reads the vendor user/token pair from
//!   Secrets Manager.

pub mod s3;
pub mod secrets;

pub use s3::S3StateSource;
pub use secrets::SecretsManagerCredentials;
