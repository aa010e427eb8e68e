pub mod quote_gateway;
