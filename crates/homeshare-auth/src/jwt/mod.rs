//! JWT token encoding, decoding, and claims management.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, TokenParameters, TokenType};
pub use decoder::{JwtDecoder, TokenError};
pub use encoder::{IssuedToken, JwtEncoder, TokenPair};
