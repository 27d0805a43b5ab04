use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{Either, select};
use gloo_file::File as GlooFile;
use gloo_net::http::{Request, RequestBuilder};
use gloo_timers::future::TimeoutFuture;
use shared::multipart::{self, FIELD_NAME};
use shared::{ClassifierError, ClassifierTransport, HealthVariant, HttpReply, ImageFile, TransportVariant};
use wasm_bindgen::JsValue;
use web_sys::FormData;

/// A file picked, dropped, or pasted by the user.
#[derive(Clone)]
pub struct BrowserFile(GlooFile);

impl From<GlooFile> for BrowserFile {
    fn from(file: GlooFile) -> Self {
        Self(file)
    }
}

#[async_trait(?Send)]
impl ImageFile for BrowserFile {
    fn name(&self) -> String {
        self.0.name()
    }

    fn mime_type(&self) -> String {
        self.0.raw_mime_type()
    }

    fn size(&self) -> u64 {
        self.0.size()
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, String> {
        gloo_file::futures::read_as_bytes(&self.0)
            .await
            .map_err(|e| format!("{:?}", e))
    }
}

/// `gloo-net` transport against the hosted classifier.
pub struct GlooTransport;

#[async_trait(?Send)]
impl ClassifierTransport for GlooTransport {
    type File = BrowserFile;

    async fn send_predict(
        &self,
        variant: TransportVariant,
        url: &str,
        file: &BrowserFile,
        timeout: Duration,
    ) -> Result<HttpReply, ClassifierError> {
        let request = match variant {
            TransportVariant::Primary => Request::post(url)
                .header("Accept", "application/json")
                .body(form_data(file)?)
                .map_err(transport_error)?,
            TransportVariant::DirectFetch => {
                Request::post(url).body(form_data(file)?).map_err(transport_error)?
            }
            TransportVariant::ExplicitBoundary => {
                let bytes = file.read_bytes().await.map_err(ClassifierError::Transport)?;
                let boundary = multipart::new_boundary();
                let body = multipart::encode_file_part(
                    &boundary,
                    FIELD_NAME,
                    &file.name(),
                    &file.mime_type(),
                    &bytes,
                );
                Request::post(url)
                    .header("Accept", "application/json")
                    .header("Content-Type", &multipart::content_type(&boundary))
                    .body(js_sys::Uint8Array::from(body.as_slice()))
                    .map_err(transport_error)?
            }
        };

        with_timeout(exchange(request), timeout).await
    }

    async fn send_health(
        &self,
        variant: HealthVariant,
        url: &str,
        timeout: Duration,
    ) -> Result<HttpReply, ClassifierError> {
        let builder: RequestBuilder = match variant {
            HealthVariant::Primary => Request::get(url).header("Accept", "application/json"),
            HealthVariant::DirectFetch => Request::get(url),
        };
        let request = builder.build().map_err(transport_error)?;

        with_timeout(exchange(request), timeout).await
    }
}

fn form_data(file: &BrowserFile) -> Result<FormData, ClassifierError> {
    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename(FIELD_NAME, file.0.as_ref(), &file.0.name())
        .map_err(js_error)?;
    Ok(form)
}

async fn exchange(request: Request) -> Result<HttpReply, ClassifierError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    Ok(HttpReply { status, body })
}

async fn with_timeout<T>(
    work: impl Future<Output = Result<T, ClassifierError>>,
    timeout: Duration,
) -> Result<T, ClassifierError> {
    let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
    match select(Box::pin(work), TimeoutFuture::new(millis)).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right(_) => Err(ClassifierError::Timeout(timeout)),
    }
}

fn transport_error(err: gloo_net::Error) -> ClassifierError {
    ClassifierError::Transport(err.to_string())
}

fn js_error(err: JsValue) -> ClassifierError {
    ClassifierError::Transport(format!("{:?}", err))
}
