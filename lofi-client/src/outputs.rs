//! Rendered output endpoints

use crate::ServiceClient;
use crate::error::Result;
use lofi_core::dto::job::OutputList;

impl ServiceClient {
    /// Download a rendered video
    ///
    /// # Arguments
    /// * `locator` - Result file name of a completed job
    pub async fn download(&self, locator: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(&["download", locator])?;
        let response = self.get(url).send().await?;

        self.handle_bytes(response).await
    }

    /// List the rendered files available on the service
    pub async fn fetch_outputs(&self) -> Result<Vec<String>> {
        let response = self.get(self.endpoint(&["videos"])?).send().await?;
        let list: OutputList = self.handle_response(response).await?;

        Ok(list.videos)
    }
}
