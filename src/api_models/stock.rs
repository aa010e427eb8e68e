use crate::utils::config::parse_symbol_list;

/// `/stock?symbol=AAPL,MSFT` 与 `/stock?symbol=AAPL&symbol=MSFT` 两种写法都接受
pub fn requested_symbols(params: &[(String, String)]) -> Vec<String> {
    let joined = params
        .iter()
        .filter(|(key, _)| key == "symbol")
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join(",");
    parse_symbol_list(&joined)
}
