use salesq_core::{Record, Table};

/// A sale of `sales` ordered on `date` (`YYYY-MM-DD`), shipped three days
/// later, with every text field empty
pub fn sale(date: &str, sales: f64) -> Record {
    let order_date: chrono::NaiveDate = date.parse().unwrap();
    Record {
        row_id: String::new(),
        order_date,
        ship_date: order_date + chrono::Days::new(3),
        sales,
        category: String::new(),
        sub_category: String::new(),
        region: String::new(),
        state: String::new(),
        segment: String::new(),
        ship_mode: String::new(),
        customer_name: String::new(),
        product_name: String::new(),
    }
}

/// Small store spread over two years, four regions and three categories
pub fn store() -> Table {
    let rows = [
        ("2015-03-10", 500.0, "Furniture", "West", "Consumer", "Standard Class", "Ann Chong", "Hon Stacking Chair", "California"),
        ("2015-11-02", 1200.0, "Technology", "East", "Corporate", "First Class", "Sean Miller", "Apple iPhone", "New York"),
        ("2016-01-15", 80.0, "Office Supplies", "Central", "Consumer", "Standard Class", "Ann Chong", "Xerox 1967", "Texas"),
        ("2016-11-20", 900.0, "Technology", "West", "Home Office", "Second Class", "Tamara Chand", "Canon imageCLASS Copier", "Washington"),
        ("2016-06-05", 300.0, "Furniture", "South", "Corporate", "Standard Class", "Sean Miller", "Bretford Conference Table", "Florida"),
        ("2016-02-08", 20.0, "Office Supplies", "South", "Consumer", "Same Day", "Raymond Buch", "Avery Labels", "Florida"),
    ];
    Table::from_records(
        rows.into_iter()
            .map(|(date, sales, category, region, segment, ship_mode, customer, product, state)| Record {
                category: category.to_string(),
                sub_category: category.to_string(),
                region: region.to_string(),
                state: state.to_string(),
                segment: segment.to_string(),
                ship_mode: ship_mode.to_string(),
                customer_name: customer.to_string(),
                product_name: product.to_string(),
                ..sale(date, sales)
            })
            .collect(),
    )
}
