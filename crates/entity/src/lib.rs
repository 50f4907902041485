pub mod verification_request;

pub use verification_request::Entity as VerificationRequest;
