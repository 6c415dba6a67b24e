//! Form types and the multipart parser for listing create/update
//! submissions, which mix scalar fields, file uploads, and image-deletion
//! markers in one body.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use serde::Deserialize;
use validator::Validate;

use crate::error::PageError;

/// Scalar fields of the campground form.
#[derive(Debug, Deserialize, Validate)]
pub struct ListingForm {
    /// Title of the campground
    #[validate(length(min = 1, max = 100, message = "Title is required"))]
    pub title: String,

    /// Description of the campground
    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,

    /// Price per night
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    /// Human-readable location
    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    pub location: String,

    /// Longitude, defaults to 0 when absent
    pub longitude: f64,

    /// Latitude, defaults to 0 when absent
    pub latitude: f64,
}

/// One uploaded file from the multipart body.
#[derive(Debug)]
pub struct UploadedFile {
    /// Client-side filename
    pub filename: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// A fully parsed campground submission.
#[derive(Debug)]
pub struct ListingSubmission {
    /// Validated scalar fields
    pub form: ListingForm,
    /// Uploaded files in submission order
    pub files: Vec<UploadedFile>,
    /// Image filenames marked for deletion (update form only)
    pub delete_images: Vec<String>,
}

/// Review form posted under a listing.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewForm {
    /// Review text
    #[validate(length(min = 1, max = 1000, message = "Review text is required"))]
    pub body: String,

    /// Rating from 1 to 5
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
}

fn parse_number(fields: &HashMap<String, String>, name: &str) -> Result<f64, PageError> {
    match fields.get(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| PageError::Validation(format!("{} must be a number", name))),
        _ => Ok(0.0),
    }
}

/// Parses the multipart campground form: text fields, `image` file parts in
/// upload order, and `delete_images` markers. Validates the scalar fields
/// before returning.
pub async fn parse_listing_form(mut payload: Multipart) -> Result<ListingSubmission, PageError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut files = Vec::new();
    let mut delete_images = Vec::new();

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "image" => {
                // Browsers send an empty part when no file was picked.
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    if !data.is_empty() {
                        files.push(UploadedFile {
                            filename,
                            bytes: data,
                        });
                    }
                }
            }
            "delete_images" => {
                let value = String::from_utf8_lossy(&data).into_owned();
                if !value.is_empty() {
                    delete_images.push(value);
                }
            }
            _ => {
                fields.insert(name, String::from_utf8_lossy(&data).into_owned());
            }
        }
    }

    let form = ListingForm {
        title: fields.get("title").cloned().unwrap_or_default(),
        description: fields.get("description").cloned().unwrap_or_default(),
        price: parse_number(&fields, "price")?,
        location: fields.get("location").cloned().unwrap_or_default(),
        longitude: parse_number(&fields, "longitude")?,
        latitude: parse_number(&fields, "latitude")?,
    };

    form.validate()
        .map_err(|e| PageError::Validation(format!("Validation error: {}", e)))?;

    Ok(ListingSubmission {
        form,
        files,
        delete_images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_form_bounds() {
        let form = ListingForm {
            title: String::new(),
            description: "ok".to_string(),
            price: -1.0,
            location: "somewhere".to_string(),
            longitude: 0.0,
            latitude: 0.0,
        };
        assert!(form.validate().is_err());

        let form = ListingForm {
            title: "Dusty Flats".to_string(),
            description: "A quiet spot".to_string(),
            price: 20.0,
            location: "Moab, Utah".to_string(),
            longitude: -109.5,
            latitude: 38.6,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_review_form_bounds() {
        let review = ReviewForm {
            body: "Great".to_string(),
            rating: 6,
        };
        assert!(review.validate().is_err());

        let review = ReviewForm {
            body: "Great".to_string(),
            rating: 5,
        };
        assert!(review.validate().is_ok());
    }
}
