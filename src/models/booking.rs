//! Repair bookings left by customers on the public site
use std::fmt;

use chrono::NaiveDateTime;
use validator::Validate;

use models::validation_rules::*;

table! {
    bookings (id) {
        id -> Integer,
        customer_name -> VarChar,
        customer_email -> VarChar,
        customer_phone -> Nullable<VarChar>,
        message -> Nullable<VarChar>,
        category_id -> Nullable<Integer>,
        brand_id -> Nullable<Integer>,
        model_id -> Nullable<Integer>,
        service_id -> Nullable<Integer>,
        status -> VarChar,
        estimated_price -> Nullable<Double>,
        final_price -> Nullable<Double>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match *self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod diesel_impl {
    use std::error::Error;
    use std::io::Write;
    use std::str;

    use diesel::deserialize::Queryable;
    use diesel::expression::bound::Bound;
    use diesel::expression::AsExpression;
    use diesel::pg::Pg;
    use diesel::row::Row;
    use diesel::serialize::Output;
    use diesel::sql_types::VarChar;
    use diesel::types::{FromSqlRow, IsNull, NotNull, SingleValue, ToSql};

    use super::BookingStatus;

    impl NotNull for BookingStatus {}
    impl SingleValue for BookingStatus {}

    impl FromSqlRow<VarChar, Pg> for BookingStatus {
        fn build_from_row<R: Row<Pg>>(row: &mut R) -> Result<Self, Box<Error + Send + Sync>> {
            match row.take() {
                Some(value) => {
                    let code = str::from_utf8(value).unwrap_or("unreadable value");
                    BookingStatus::from_code(code).ok_or_else(|| format!("Unrecognized enum variant for BookingStatus: {}", code).into())
                }
                None => Err("Unexpected null for non-null column `status`".into()),
            }
        }
    }

    impl Queryable<VarChar, Pg> for BookingStatus {
        type Row = BookingStatus;
        fn build(row: Self::Row) -> Self {
            row
        }
    }

    impl ToSql<VarChar, Pg> for BookingStatus {
        fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> Result<IsNull, Box<Error + Send + Sync>> {
            out.write_all(self.as_str().as_bytes())?;
            Ok(IsNull::No)
        }
    }

    impl AsExpression<VarChar> for BookingStatus {
        type Expression = Bound<VarChar, BookingStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl<'a> AsExpression<VarChar> for &'a BookingStatus {
        type Expression = Bound<VarChar, &'a BookingStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "bookings"]
pub struct Booking {
    pub id: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub message: Option<String>,
    pub category_id: Option<i32>,
    pub brand_id: Option<i32>,
    pub model_id: Option<i32>,
    pub service_id: Option<i32>,
    pub status: BookingStatus,
    pub estimated_price: Option<f64>,
    pub final_price: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Booking form as submitted by a customer
#[derive(Serialize, Deserialize, Validate, Clone, Debug)]
pub struct NewBooking {
    #[validate(length(min = "2", max = "100"), custom = "validate_not_blank")]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    #[validate(custom = "validate_phone")]
    pub customer_phone: Option<String>,
    #[validate(length(max = "5000"))]
    pub message: Option<String>,
    pub category_id: Option<i32>,
    pub brand_id: Option<i32>,
    pub model_id: Option<i32>,
    pub service_id: Option<i32>,
}

/// Row written for a new booking, always starts as pending
#[derive(Insertable, Clone, Debug)]
#[table_name = "bookings"]
pub struct InsertBooking {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub message: Option<String>,
    pub category_id: Option<i32>,
    pub brand_id: Option<i32>,
    pub model_id: Option<i32>,
    pub service_id: Option<i32>,
    pub status: BookingStatus,
    pub estimated_price: Option<f64>,
}

impl InsertBooking {
    pub fn new(payload: NewBooking, estimated_price: Option<f64>) -> Self {
        Self {
            customer_name: payload.customer_name.trim().to_string(),
            customer_email: payload.customer_email.trim().to_string(),
            customer_phone: payload.customer_phone,
            message: payload.message,
            category_id: payload.category_id,
            brand_id: payload.brand_id,
            model_id: payload.model_id,
            service_id: payload.service_id,
            status: BookingStatus::Pending,
            estimated_price,
        }
    }
}

#[derive(Default, Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "bookings"]
pub struct UpdateBooking {
    pub status: Option<BookingStatus>,
    #[validate(range(min = "0", max = "100000"))]
    pub final_price: Option<f64>,
    #[validate(length(max = "5000"))]
    pub message: Option<String>,
}

impl UpdateBooking {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.final_price.is_none() && self.message.is_none()
    }
}

#[derive(Default, Clone, Debug)]
pub struct BookingsSearchTerms {
    pub status: Option<BookingStatus>,
    pub search: Option<String>,
}
