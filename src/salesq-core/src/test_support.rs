//! Record fixtures shared by the unit tests

use crate::record::{Record, Table};

use chrono::NaiveDate;

/// Builder over a record with neutral defaults
pub(crate) struct Sale(Record);

pub(crate) fn sale(category: &str, sales: f64) -> Sale {
    Sale(Record {
        row_id: String::new(),
        order_date: date(2015, 1, 1),
        ship_date: date(2015, 1, 4),
        sales,
        category: category.to_string(),
        sub_category: String::new(),
        region: "West".to_string(),
        state: "California".to_string(),
        segment: "Consumer".to_string(),
        ship_mode: "Standard Class".to_string(),
        customer_name: "Customer".to_string(),
        product_name: "Product".to_string(),
    })
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

impl Sale {
    pub(crate) fn ordered(mut self, year: i32, month: u32, day: u32) -> Self {
        self.0.order_date = date(year, month, day);
        self.0.ship_date = self.0.order_date + chrono::Duration::days(3);
        self
    }

    pub(crate) fn shipped_after(mut self, days: i64) -> Self {
        self.0.ship_date = self.0.order_date + chrono::Duration::days(days);
        self
    }

    pub(crate) fn sub_category(mut self, value: &str) -> Self {
        self.0.sub_category = value.to_string();
        self
    }

    pub(crate) fn region(mut self, value: &str) -> Self {
        self.0.region = value.to_string();
        self
    }

    pub(crate) fn state(mut self, value: &str) -> Self {
        self.0.state = value.to_string();
        self
    }

    pub(crate) fn segment(mut self, value: &str) -> Self {
        self.0.segment = value.to_string();
        self
    }

    pub(crate) fn ship_mode(mut self, value: &str) -> Self {
        self.0.ship_mode = value.to_string();
        self
    }

    pub(crate) fn customer(mut self, value: &str) -> Self {
        self.0.customer_name = value.to_string();
        self
    }

    pub(crate) fn product(mut self, value: &str) -> Self {
        self.0.product_name = value.to_string();
        self
    }

    pub(crate) fn build(self) -> Record {
        self.0
    }
}

pub(crate) fn table(sales: Vec<Sale>) -> Table {
    Table::from_records(sales.into_iter().map(Sale::build).collect())
}

/// A small store spanning three years, four regions and three categories
pub(crate) fn store() -> Table {
    table(vec![
        sale("Furniture", 500.0)
            .ordered(2015, 3, 10)
            .sub_category("Chairs")
            .region("West")
            .state("California")
            .segment("Consumer")
            .ship_mode("Standard Class")
            .customer("Ann Chong")
            .product("Hon Stacking Chair"),
        sale("Technology", 1200.0)
            .ordered(2015, 11, 2)
            .sub_category("Phones")
            .region("East")
            .state("New York")
            .segment("Corporate")
            .ship_mode("First Class")
            .customer("Sean Miller")
            .product("Apple iPhone"),
        sale("Office Supplies", 80.0)
            .ordered(2016, 1, 15)
            .sub_category("Paper")
            .region("Central")
            .state("Texas")
            .segment("Consumer")
            .ship_mode("Standard Class")
            .customer("Ann Chong")
            .product("Xerox 1967"),
        sale("Technology", 900.0)
            .ordered(2016, 11, 20)
            .sub_category("Machines")
            .region("West")
            .state("Washington")
            .segment("Home Office")
            .ship_mode("Second Class")
            .customer("Tamara Chand")
            .product("Canon imageCLASS Copier"),
        sale("Furniture", 300.0)
            .ordered(2016, 6, 5)
            .sub_category("Tables")
            .region("South")
            .state("Florida")
            .segment("Corporate")
            .ship_mode("Standard Class")
            .customer("Sean Miller")
            .product("Bretford Conference Table"),
        sale("Office Supplies", 20.0)
            .ordered(2017, 2, 8)
            .sub_category("Labels")
            .region("South")
            .state("Florida")
            .segment("Consumer")
            .ship_mode("Same Day")
            .customer("Raymond Buch")
            .product("Avery Labels"),
        sale("Technology", 1500.0)
            .ordered(2017, 11, 28)
            .sub_category("Phones")
            .region("East")
            .state("New York")
            .segment("Corporate")
            .ship_mode("Standard Class")
            .customer("Tamara Chand")
            .product("Apple iPhone"),
    ])
}
