use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{info, warn};

use super::directory_service::DirectoryService;
use crate::context::{Notifier, Translator};
use crate::types::{ImportErrorBody, ImportRequest};

/// Message key notified when the imported accounts already exist.
pub const IMPORT_ALREADY_EXISTS: &str = "directory.import.already.exists";

/// Turn the `message` of a failed import into the text shown to the operator.
///
/// A message of exactly two whitespace separated tokens is read as a
/// catalogue key followed by a parameter appended to its translation.
pub fn interpret_import_error(message: &str, translator: &dyn Translator) -> String {
    let tokens: Vec<&str> = message.split(char::is_whitespace).collect();
    if let [key, parameter] = tokens.as_slice() {
        return format!("{}{}", translator.translate(key), parameter);
    }

    if message.contains("already exists") {
        translator.translate(IMPORT_ALREADY_EXISTS)
    } else {
        message.to_string()
    }
}

impl DirectoryService {
    /// Upload a CSV file of accounts of one type into a class.
    ///
    /// Failures are reported through `notifier` and never returned. A failed
    /// upload whose body carries no readable `message` is only logged.
    pub async fn import_file(
        &self,
        request: ImportRequest,
        notifier: &dyn Notifier,
        translator: &dyn Translator,
    ) {
        let file_name = request.file_name.clone();
        let part = Part::bytes(request.contents).file_name(request.file_name);
        let form = Form::new()
            .part(request.user_type.as_str().to_string(), part)
            .text(
                "classExternalId",
                request.class_external_id.unwrap_or_default(),
            );

        let upload = self
            .request_to(Method::POST, self.import_url())
            .multipart(form);

        let response = match upload.send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(file = %file_name, %error, "import upload failed");
                return;
            }
        };

        let status = response.status();
        if status.is_success() {
            info!(file = %file_name, user_type = %request.user_type, "import accepted");
            return;
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(error) => {
                warn!(file = %file_name, %status, %error, "unable to read import error body");
                return;
            }
        };

        match serde_json::from_slice::<ImportErrorBody>(&body) {
            Ok(ImportErrorBody {
                message: Some(message),
            }) if !message.is_empty() => {
                warn!(file = %file_name, %status, %message, "import rejected");
                notifier.error(&interpret_import_error(&message, translator));
            }
            Ok(_) => warn!(file = %file_name, %status, "import rejected without message"),
            Err(error) => warn!(file = %file_name, %status, %error, "undecodable import error body"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CatalogTranslator, KeyTranslator};

    #[test]
    fn two_tokens_translate_key_and_append_parameter() {
        let translator = CatalogTranslator::new([("import.error.line", "Error on line ")]);
        assert_eq!(
            interpret_import_error("import.error.line 12", &translator),
            "Error on line 12"
        );
    }

    #[test]
    fn already_exists_maps_to_canned_key() {
        assert_eq!(
            interpret_import_error("user jdoe already exists in class", &KeyTranslator),
            IMPORT_ALREADY_EXISTS
        );
    }

    #[test]
    fn other_messages_pass_through() {
        assert_eq!(
            interpret_import_error("invalid csv header", &KeyTranslator),
            "invalid csv header"
        );
        assert_eq!(interpret_import_error("single", &KeyTranslator), "single");
    }

    #[test]
    fn consecutive_whitespace_counts_as_extra_token() {
        assert_eq!(
            interpret_import_error("key  param", &KeyTranslator),
            "key  param"
        );
    }
}
