#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    course_catalog::run().await
}
