pub mod cloudinary_api;
