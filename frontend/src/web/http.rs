//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现核心库的 [`HttpClient`] 接口。

use async_trait::async_trait;
use clinic_console::{ConsoleError, ConsoleResult, HttpClient, HttpRequest, HttpResponse};
use clinic_console_shared::protocol::{FormField, FormValue, RequestBody};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response};

/// 基于 fetch 的 HTTP 客户端
#[derive(Clone, Copy, Default)]
pub struct FetchHttpClient;

/// multipart 表单：文本字段直接追加，文件字段包装成带文件名的 Blob
fn form_data(fields: &[FormField]) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    for field in fields {
        match &field.value {
            FormValue::Text(text) => form.append_with_str(&field.name, text)?,
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let parts = Array::new();
                parts.push(&Uint8Array::from(bytes.as_slice()));
                let options = BlobPropertyBag::new();
                options.set_type(content_type);
                let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
                form.append_with_blob_and_filename(&field.name, &blob, file_name)?;
            }
        }
    }
    Ok(form)
}

fn build_request(req: &HttpRequest) -> Result<Request, JsValue> {
    let headers = Headers::new()?;
    for (key, value) in &req.headers {
        headers.set(key, value)?;
    }

    let opts = RequestInit::new();
    opts.set_method(req.method.as_str());

    match &req.body {
        RequestBody::Empty => {}
        RequestBody::Json(json) => {
            headers.set("Content-Type", "application/json")?;
            opts.set_body(&JsValue::from_str(json));
        }
        // Content-Type (含 boundary) 由浏览器生成
        RequestBody::Form(fields) => opts.set_body(&form_data(fields)?),
    }
    opts.set_headers(&headers);

    Request::new_with_str_and_init(&req.url, &opts)
}

#[async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> ConsoleResult<HttpResponse> {
        let request = build_request(&req)
            .map_err(|e| ConsoleError::network(format!("请求构建失败: {:?}", e)))?;

        let window = web_sys::window()
            .ok_or_else(|| ConsoleError::network("无法获取 window 对象"))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ConsoleError::network(format!("{:?}", e)))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| ConsoleError::network(format!("Response 类型转换失败: {:?}", e)))?;
        let status = response.status();

        let promise = response
            .text()
            .map_err(|e| ConsoleError::network(format!("读取响应失败: {:?}", e)))?;
        let body = JsFuture::from(promise)
            .await
            .map_err(|e| ConsoleError::network(format!("读取响应失败: {:?}", e)))?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse { status, body })
    }
}
