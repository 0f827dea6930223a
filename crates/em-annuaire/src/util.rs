pub fn default_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().gzip(true).brotli(true).build()
}
