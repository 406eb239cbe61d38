//! JavaScript execution operations for CDP page session.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::CdpError;
use crate::protocol::RemoteObject;

use super::core::PageSession;

/// Object group every element handle is minted into.
pub const OBJECT_GROUP: &str = "glidepath";

impl PageSession {
    /// Evaluate a JavaScript expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Evaluate JavaScript and return a remote object in [`OBJECT_GROUP`].
    pub async fn evaluate_handle(&self, expression: &str) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": false,
                    "objectGroup": OBJECT_GROUP,
                })),
            )
            .await?;

        check_exception(&result)?;
        let remote_obj: RemoteObject = serde_json::from_value(result["result"].clone())?;
        Ok(remote_obj)
    }

    /// Call a function with `this` bound to a remote object.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Option<Vec<Value>>,
    ) -> Result<Value, CdpError> {
        let mut params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "returnByValue": true,
            "awaitPromise": true,
        });

        if let Some(a) = args {
            params["arguments"] =
                json!(a.into_iter().map(|v| json!({"value": v})).collect::<Vec<_>>());
        }

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// [`call_function_on`](Self::call_function_on), deserializing the value.
    pub async fn call_function_as<T: DeserializeOwned>(
        &self,
        object_id: &str,
        function: &str,
        args: Option<Vec<Value>>,
    ) -> Result<T, CdpError> {
        let value = self.call_function_on(object_id, function, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Drop every handle minted since the last release.
    pub async fn release_handles(&self) -> Result<(), CdpError> {
        self.call(
            "Runtime.releaseObjectGroup",
            Some(json!({ "objectGroup": OBJECT_GROUP })),
        )
        .await?;
        Ok(())
    }
}

/// Turn `exceptionDetails` into a [`CdpError::JavaScript`].
pub(crate) fn check_exception(result: &Value) -> Result<(), CdpError> {
    let Some(exception) = result.get("exceptionDetails") else {
        return Ok(());
    };
    // The thrown message lives in the exception's description; `text` is
    // usually just "Uncaught".
    let text = exception["exception"]["description"]
        .as_str()
        .or_else(|| exception["text"].as_str())
        .unwrap_or("Unknown error");
    Err(CdpError::JavaScript(text.to_string()))
}
