//! Write models. Every field is optional so one struct serves create (POST) and update (PUT):
//! only fields present in the body are written, an explicit `null` clears the column.

use crate::keywords::image_keywords;
use crate::store::Row;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// `None` when absent, `Some(None)` when null, `Some(Some(v))` otherwise.
pub type Field<T> = Option<Option<T>>;

fn present<'de, T, D>(d: D) -> Result<Field<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// Decimal carried as a string; numbers are converted so precision is never lost to floats later.
fn present_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Field<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None => Ok(Some(None)),
        // f64 Display never uses exponent notation, unlike serde_json's.
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => Ok(Some(Some(f.to_string()))),
            _ => Ok(Some(Some(n.to_string()))),
        },
        Some(Value::String(s)) => Ok(Some(Some(s.trim().to_string()))),
        Some(_) => Err(de::Error::custom("price must be a number or a string")),
    }
}

fn present_integer<'de, D: Deserializer<'de>>(d: D) -> Result<Field<i64>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None => Ok(Some(None)),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(|n| Some(Some(n)))
            .ok_or_else(|| de::Error::custom("expected an integer")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(|n| Some(Some(n)))
            .map_err(|_| de::Error::custom("expected an integer")),
        Some(_) => Err(de::Error::custom("expected an integer")),
    }
}

/// Image lists keep only non-blank strings.
fn present_images<'de, D: Deserializer<'de>>(d: D) -> Result<Field<Vec<String>>, D::Error> {
    let list = Option::<Vec<Value>>::deserialize(d)?;
    Ok(Some(list.map(|items| {
        items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect()
    })))
}

fn put<T: Into<Value>>(row: &mut Row, column: &str, field: Field<T>) {
    if let Some(v) = field {
        row.insert(column.to_string(), v.map_or(Value::Null, Into::into));
    }
}

fn is_blank(field: &Field<String>) -> bool {
    match field {
        None | Some(None) => true,
        Some(Some(s)) => s.trim().is_empty(),
    }
}

fn text(field: &Field<String>) -> Option<&str> {
    field.as_ref().and_then(|v| v.as_deref()).filter(|s| !s.trim().is_empty())
}

pub const PRODUCT_REQUIRED: [&str; 5] = ["name", "sku", "price", "type", "seo_name"];

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ProductPatch {
    #[serde(default, deserialize_with = "present")]
    pub name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub sku: Field<String>,
    #[serde(default, deserialize_with = "present_decimal")]
    pub price: Field<String>,
    #[serde(rename = "type", default, deserialize_with = "present")]
    pub product_type: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub main_image: Field<String>,
    #[serde(default, deserialize_with = "present_images")]
    pub images: Field<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image_path: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub image_keywords: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub href: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub describe: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub fqa: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub video_url: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub seo_name: Field<String>,
}

impl ProductPatch {
    /// Normalize image fields before writing.
    ///
    /// Images are de-duplicated in order. A blank main image takes the first image; on create an
    /// absent main image does too, while an update that omits it keeps the stored one. On create a
    /// main image with no image list seeds the list, and missing keywords are derived from it.
    pub fn curate(&mut self, creating: bool) {
        if let Some(Some(images)) = &mut self.images {
            let mut seen = Vec::with_capacity(images.len());
            images.retain(|img| {
                if seen.contains(img) {
                    false
                } else {
                    seen.push(img.clone());
                    true
                }
            });
        }

        let main_missing = match &self.main_image {
            None => creating,
            Some(_) => is_blank(&self.main_image),
        };
        let first = self
            .images
            .as_ref()
            .and_then(|v| v.as_ref())
            .and_then(|v| v.first())
            .cloned();
        if main_missing {
            if let Some(first) = first {
                self.main_image = Some(Some(first));
            }
        }

        if !creating {
            return;
        }
        let no_images = self.images.as_ref().and_then(|v| v.as_ref()).map_or(true, Vec::is_empty);
        if let Some(main) = text(&self.main_image).map(String::from) {
            if no_images {
                self.images = Some(Some(vec![main.clone()]));
            }
            if is_blank(&self.image_keywords) {
                let words = image_keywords(&main, text(&self.name), text(&self.product_type));
                self.image_keywords = Some(Some(words.join(",")));
            }
        }
    }

    pub fn into_row(self) -> Row {
        let mut row = Row::new();
        put(&mut row, "name", self.name);
        put(&mut row, "sku", self.sku);
        put(&mut row, "price", self.price);
        put(&mut row, "type", self.product_type);
        put(&mut row, "main_image", self.main_image);
        put(&mut row, "images", self.images);
        put(&mut row, "image_path", self.image_path);
        put(&mut row, "image_keywords", self.image_keywords);
        put(&mut row, "href", self.href);
        put(&mut row, "describe", self.describe);
        put(&mut row, "fqa", self.fqa);
        put(&mut row, "video_url", self.video_url);
        put(&mut row, "seo_name", self.seo_name);
        row
    }
}

pub const PRODUCT_TYPE_REQUIRED: [&str; 2] = ["type_key", "type_label"];

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ProductTypePatch {
    #[serde(default, deserialize_with = "present")]
    pub type_key: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub type_label: Field<String>,
    #[serde(default, deserialize_with = "present_integer")]
    pub sort: Field<i64>,
}

impl ProductTypePatch {
    pub fn into_row(self, creating: bool) -> Row {
        let sort = match self.sort {
            None | Some(None) if creating => Some(Some(0)),
            other => other,
        };
        let mut row = Row::new();
        put(&mut row, "type_key", self.type_key);
        put(&mut row, "type_label", self.type_label);
        put(&mut row, "sort", sort);
        row
    }
}

pub const LEAVE_MESSAGE_REQUIRED: [&str; 5] = ["email", "first_name", "last_name", "content", "topic"];

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct LeaveMessagePatch {
    #[serde(default, deserialize_with = "present")]
    pub email: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub first_name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub content: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub topic: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Field<String>,
}

impl LeaveMessagePatch {
    pub fn into_row(self) -> Row {
        let mut row = Row::new();
        put(&mut row, "email", self.email);
        put(&mut row, "first_name", self.first_name);
        put(&mut row, "last_name", self.last_name);
        put(&mut row, "content", self.content);
        put(&mut row, "topic", self.topic);
        put(&mut row, "phone", self.phone);
        row
    }
}
