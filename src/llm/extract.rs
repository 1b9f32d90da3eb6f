// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON isolation for free-text model replies.

use crate::engine_core::errors::ClassifierError;
use serde_json::Value;

/// Return the first top-level JSON object embedded in `text`.
///
/// Models wrap JSON in prose or code fences. Starting at each `{` in turn,
/// exactly one JSON value is read; trailing text after it is ignored.
/// A candidate that runs into the end of input means the reply was cut off,
/// and the search stops there.
pub fn extract_first_json_object(text: &str) -> Result<Value, ClassifierError> {
    let mut last_error = None;

    for (start, _) in text.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value @ Value::Object(_))) => return Ok(value),
            Some(Ok(_)) => {}
            Some(Err(e)) if e.is_eof() => {
                last_error = Some(e.to_string());
                break;
            }
            Some(Err(e)) => last_error = Some(e.to_string()),
            None => {}
        }
    }

    Err(ClassifierError::ResponseFormatError(match last_error {
        Some(e) => format!("no parsable JSON object in model reply: {}", e),
        None => "model reply contains no JSON object".to_string(),
    }))
}
