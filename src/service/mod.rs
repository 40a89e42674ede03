pub mod token_verifier;
